pub mod constants;
pub mod gray_frame;
