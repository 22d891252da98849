pub mod credentials;
pub mod enrollment;
pub mod policy;
pub mod tokens;
