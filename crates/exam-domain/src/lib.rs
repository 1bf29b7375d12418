// exam-domain library entry point
pub mod error;
pub mod question;
pub mod role;
pub mod user;
pub use error::DomainError;
pub use question::{FlagStatus, FlagType, Question, QuestionEdit, QuestionStatus, QuestionType, VariantDraft};
pub use role::Role;
pub use user::UserAccount;
