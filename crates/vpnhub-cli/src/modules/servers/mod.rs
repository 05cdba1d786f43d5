mod actions;
pub(crate) mod args;
mod format_table;

pub(crate) use actions::handle_servers;
#[cfg(test)]
pub(crate) use format_table::render_servers_table;
