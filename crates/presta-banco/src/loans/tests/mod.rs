mod common;
mod service;
mod status;
