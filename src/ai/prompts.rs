//! Prompt builders for the generative model.

/// Classification prompt for a plant image.
pub fn classification_prompt() -> String {
    "Analyze this plant image and identify the most likely disease or condition.\n\
     \n\
     Return a JSON object with the following structure:\n\
     {\n\
       \"disease\": \"Name of the disease or 'unknown' if not confident\",\n\
       \"confidence\": 0.95,\n\
       \"rationale\": \"Brief explanation of your diagnosis\"\n\
     }\n\
     \n\
     The confidence must be a value between 0 and 1.\n\
     If you cannot identify a specific disease with confidence above 0.5, return \"unknown\" as the disease.\n\
     Focus on common plant diseases like powdery mildew, early blight, leaf spot, etc."
        .to_string()
}

/// Treatment recommendation prompt for a named disease.
pub fn recommendation_prompt(disease: &str) -> String {
    format!(
        "Provide treatment recommendations for \"{disease}\" in plants.\n\
         \n\
         Return a JSON object with the following structure:\n\
         {{\n\
           \"method\": \"organic\",\n\
           \"steps\": [\"Step 1: Description\", \"Step 2: Description\"],\n\
           \"notes\": \"Additional notes or precautions\"\n\
         }}\n\
         \n\
         The method must be one of: organic, chemical, cultural, integrated.\n\
         Guidelines:\n\
         - Prioritize organic and cultural methods when possible\n\
         - Include household-safe options\n\
         - Avoid recommending banned or highly toxic substances\n\
         - Make advice region-agnostic\n\
         - If the disease is \"unknown\", provide general plant care advice"
    )
}

/// Free-form plant care question prompt.
pub fn care_question_prompt(message: &str) -> String {
    format!(
        "Answer this plant care question: \"{message}\"\n\
         \n\
         Provide helpful, safe advice for plant care.\n\
         If the question is about plant diseases, suggest consulting with a local expert for proper diagnosis.\n\
         Avoid recommending specific chemical products without proper warnings.\n\
         \n\
         Return a JSON object with the following structure:\n\
         {{\n\
           \"answer\": \"Your answer here\",\n\
           \"sources\": [\"Source 1\", \"Source 2\"]\n\
         }}"
    )
}
