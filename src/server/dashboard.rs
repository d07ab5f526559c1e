// src/server/dashboard.rs
// Static page that polls /health and renders the latest snapshot.

pub(crate) const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Medic</title>
<style>
body { margin: 0; font-family: sans-serif; background: #111; color: #eee; }
header { padding: 12px 16px; font-size: 22px; font-weight: 600; }
#overall { padding: 4px 10px; border-radius: 4px; margin-left: 8px; }
table { border-collapse: collapse; margin: 0 16px; min-width: 480px; }
td, th { padding: 6px 12px; text-align: left; border-bottom: 1px solid #333; }
.GREEN { background: #2e7d32; } .ORANGE { background: #ef6c00; }
.RED { background: #c62828; } .UNKNOWN { background: #555; }
#meta { padding: 8px 16px; color: #999; font-size: 13px; }
</style>
</head>
<body>
<header>Medic <span id="overall" class="UNKNOWN">UNKNOWN</span></header>
<div id="meta"></div>
<table>
<thead><tr><th>Service</th><th>Status</th><th>Description</th></tr></thead>
<tbody id="services"></tbody>
</table>
<script>
function row(s, depth) {
  const tr = document.createElement("tr");
  const name = document.createElement("td");
  name.textContent = " ".repeat(depth * 4) + s.name;
  const status = document.createElement("td");
  status.textContent = s.status;
  status.className = s.status;
  const desc = document.createElement("td");
  desc.textContent = s.description || "";
  tr.append(name, status, desc);
  const rows = [tr];
  (s.subservices || []).forEach(c => rows.push(...row(c, depth + 1)));
  return rows;
}
async function poll() {
  try {
    const data = await (await fetch("/health")).json();
    const overall = document.getElementById("overall");
    overall.textContent = data.status;
    overall.className = data.status;
    const body = document.getElementById("services");
    body.replaceChildren(...(data.services || []).flatMap(s => row(s, 0)));
    document.getElementById("meta").textContent = data.timestamp
      ? "cycle " + data.cycle + " at " + data.timestamp + " (" + data.duration_ms + "ms)"
      : data.message;
  } catch (e) {
    document.getElementById("meta").textContent = "unreachable: " + e;
  }
}
poll();
setInterval(poll, 3000);
</script>
</body>
</html>
"#;
