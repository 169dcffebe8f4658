pub mod cluster_labels;
pub mod features;
pub mod predict;
