// HTTP module entry

pub mod response;
