// handlers/public/auth/mod.rs - Token acquisition endpoints
//
// Neither route requires authentication; both hand back a fresh token.

pub mod login;  // POST /login - authenticate and get JWT
pub mod signup; // POST /signup - create account and get JWT

pub use login::login;
pub use signup::signup;
