// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, account registration and service probes.

pub mod health;
pub mod login;
pub mod register;
pub mod root;

pub use health::health;
pub use login::login;
pub use register::register;
pub use root::root;
