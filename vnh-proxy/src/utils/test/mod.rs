pub mod packet_collectors;
pub mod packet_generators;
