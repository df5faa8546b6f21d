pub mod channel_util;
