mod double_conv;
mod patch_conv;
mod stages;

pub use double_conv::*;
pub use patch_conv::*;
pub use stages::*;
