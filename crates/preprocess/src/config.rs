/// Square model input side used when nothing else is configured.
pub const DEFAULT_INPUT_SIZE: u32 = 640;

/// Gray level of the letterbox padding.
pub const LETTERBOX_COLOR: u8 = 114;
