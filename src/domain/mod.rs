/// Domain model
///
/// Documents kept in the store (users, products) and the value types
/// that travel through the authentication core.

mod product;
mod user;

pub use product::{Address, NewProduct, Order, Payment, Product};
pub use user::{Credential, NewUser, TokenPair, UserProfile, UserRecord};
