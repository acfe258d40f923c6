pub mod assignments;
pub mod auth;
pub mod directory;
pub mod middleware;
pub mod state;
pub mod users;

// Re-export the pieces the binary needs to build the router.
pub use assignments::ApiDoc;
pub use middleware::require_auth;
