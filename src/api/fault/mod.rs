pub mod fault_api;
