pub mod auditor;
pub mod whitelist;
