mod presented_token;

pub use presented_token::PresentedToken;
