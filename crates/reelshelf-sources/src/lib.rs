pub mod error;
pub mod http;
pub mod traits;

pub use error::ApiError;
pub use http::HttpFilmApi;
pub use traits::FilmApi;
