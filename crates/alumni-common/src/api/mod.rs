pub mod alumni;
pub mod events;
pub mod recommendation;
pub mod validation;

pub use alumni::{AlumnusDetail, AlumnusSummary, DirectoryResponse, ProfileCompletion};
pub use events::{EventSummary, NewEvent};
pub use recommendation::RecommendationResponse;
pub use validation::FieldError;
