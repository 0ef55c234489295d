mod health_check;
mod products;
mod users;

pub use health_check::health_check;
pub use products::{add_product, product_view, search_product};
pub use users::{current_user, login, signup};
