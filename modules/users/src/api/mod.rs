pub mod ingress;
pub mod request_id;
pub mod rest;
