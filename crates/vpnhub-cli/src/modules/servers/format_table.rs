use vpnhub_core::VpnServer;

pub(crate) fn render_servers_table(servers: &[VpnServer]) -> String {
    let mut rows = Vec::new();
    let mut name_width = "NAME".len();
    let mut location_width = "LOCATION".len();

    for server in servers {
        let location = match server.city.as_deref() {
            Some(city) => format!("{}, {}", city, server.country),
            None => server.country.clone(),
        };
        let load = server
            .load
            .map(|load| format!("{load}%"))
            .unwrap_or_else(|| "-".to_string());
        name_width = name_width.max(server.name.len());
        location_width = location_width.max(location.len());
        rows.push((
            server.id,
            server.name.as_str(),
            location,
            server.status.as_str(),
            load,
            server.protocols.join(","),
        ));
    }

    let mut out = format!(
        "{:<4}  {:<name_width$}  {:<location_width$}  {:<11}  {:<4}  PROTOCOLS\n",
        "ID", "NAME", "LOCATION", "STATUS", "LOAD"
    );
    for (id, name, location, status, load, protocols) in rows {
        out.push_str(&format!(
            "{id:<4}  {name:<name_width$}  {location:<location_width$}  {status:<11}  {load:<4}  {protocols}\n"
        ));
    }
    out
}
