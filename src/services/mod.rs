pub mod auth_service;
pub use auth_service::{AuthError, AuthService, LoginResult, require_admin};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;

pub mod marker_service;
pub use marker_service::{MarkerError, MarkerService, MarkerView, NewMarker};

pub mod marker_service_impl;
pub use marker_service_impl::SeaOrmMarkerService;

pub mod token;
pub use token::TokenService;
