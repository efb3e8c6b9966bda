mod handlers;
mod types;

pub use handlers::{create_user, delete_user, list_users, update_user, user_stats};
pub use types::{DeleteQuery, UsersResponse};

// Re-export utoipa path structs for OpenAPI documentation
pub use handlers::{
    __path_create_user, __path_delete_user, __path_list_users, __path_update_user,
    __path_user_stats,
};
