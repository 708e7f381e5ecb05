mod common;
mod export;
mod validation;
