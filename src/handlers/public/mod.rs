// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, gated registration and the active exhibition lookup.
pub mod active;
pub mod login;
pub mod register;

pub use active::ex_active_get;
pub use login::login_post;
pub use register::register_post;
