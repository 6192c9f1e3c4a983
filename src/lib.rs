pub mod api;
pub mod machine;
pub mod render;
pub mod token;
pub mod util;

pub use api::{ApiError, CampaignApi, CampaignClient};
pub use machine::{CalendarMachine, CalendarState, IdentityForm, RegistrationMode};
pub use token::TokenStore;
