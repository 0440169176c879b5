pub mod error;
pub mod features_reply;
pub mod flow_removed;
pub mod hello;
pub mod openflow;
pub mod packet_in;
pub mod port_status;
pub mod switch_config;
