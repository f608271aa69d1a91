pub mod apply;
pub mod doctor;
pub mod highlight;
pub mod input;
pub mod normalize;
pub mod scan;
