pub mod admin;
pub mod disease;
pub mod enums;
pub mod feedback;
pub mod report;
pub mod treatment;

pub use admin::Admin;
pub use disease::Disease;
pub use enums::TreatmentMethod;
pub use feedback::Feedback;
pub use report::{Report, SynthesizedTreatment};
pub use treatment::Treatment;
