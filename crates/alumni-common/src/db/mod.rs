pub mod events;
pub mod migrations;
pub mod pool;
pub mod profiles;
pub mod util;

pub use events::{EventStorageError, create_event, list_upcoming_events};
pub use migrations::{MigrationError, run_migrations};
pub use pool::{
    DbPoolError, PgPool, create_pool_from_url, create_pool_from_url_checked, create_pool_with_size,
};
pub use profiles::{
    ProfileFetchError, complete_profile, fetch_alumni_by_ids, fetch_alumnus, fetch_profiles,
    graduation_years, list_alumni,
};
