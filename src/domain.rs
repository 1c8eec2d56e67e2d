mod contact_email;
mod contact_message;
mod contact_name;
mod contact_submission;
mod contact_topic;

pub use contact_email::ContactEmail;
pub use contact_message::ContactMessage;
pub use contact_name::ContactName;
pub use contact_submission::{ContactSubmission, ValidationError};
pub use contact_topic::ContactTopic;
