pub mod temp;
pub mod wav;
