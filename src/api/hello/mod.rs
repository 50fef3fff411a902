pub mod hello_api;
