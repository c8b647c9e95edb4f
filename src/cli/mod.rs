mod commands;
mod handlers;

pub use commands::{Cli, Commands};
pub use handlers::{
    handle_delete, handle_edit, handle_list, handle_new, handle_rename, handle_show,
    handle_switch, handle_theme,
};
