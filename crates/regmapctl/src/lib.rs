pub mod cmd_convert;
