//! The dashboard page. Server-side HTML shell; charts render client-side
//! from the spec JSON the API returns (Plotly for charts, wordcloud2 for
//! the cloud).

/// Render the single dashboard page.
pub fn render_dashboard() -> String {
    let content = r#"
<div class="layout">
<aside class="sidebar">
    <h2>Control Panel</h2>
    <label for="db-select">Database</label>
    <select id="db-select"></select>
    <label for="coll-select">Collection</label>
    <select id="coll-select"></select>

    <button id="run-overview" class="primary">Kích hoạt xử lý</button>

    <hr>
    <label for="limit-input">Số dòng (slice)</label>
    <input type="number" id="limit-input" min="100" max="10000" step="100" value="2000">
    <button id="run-slice">Tải slice gần nhất</button>

    <hr>
    <label class="check"><input type="checkbox" id="outliers-toggle"> Hiển thị cả dữ liệu ngoại lai (Outliers)</label>
    <button id="reload" class="ghost">Tải lại (xóa cache)</button>
    <div id="status" class="status"></div>
</aside>

<main class="content">
    <section id="overview-section">
        <h2>Dashboard Tổng quan</h2>
        <div class="kpi-row">
            <div class="kpi"><div class="kpi-label">Tổng số bài viết</div><div class="kpi-value" id="kpi-total">–</div></div>
            <div class="kpi"><div class="kpi-label">Dữ liệu mới nhất</div><div class="kpi-value" id="kpi-year">–</div></div>
            <div class="kpi"><div class="kpi-label">Bài dài nhất (từ)</div><div class="kpi-value" id="kpi-max">–</div></div>
        </div>
        <div class="chart-grid">
            <div class="chart-card" id="chart-year"></div>
            <div class="chart-card" id="chart-top10"></div>
            <div class="chart-card wide" id="chart-dist"></div>
            <div class="chart-card wide"><canvas id="cloud-canvas" width="800" height="400"></canvas></div>
        </div>

        <h3>Xem dữ liệu chi tiết &amp; Tìm kiếm</h3>
        <div class="table-controls">
            <input type="text" id="search-input" placeholder="Tìm kiếm (Tiêu đề hoặc Nội dung)...">
            <input type="text" id="cols-input" placeholder="Cột hiển thị, phân tách bởi dấu phẩy (mặc định: title, year, word_count)">
        </div>
        <div id="table-note" class="note"></div>
        <div class="table-wrap"><table id="data-table"></table></div>
    </section>

    <section id="slice-section">
        <h2>Phân tích Nội dung (slice gần nhất)</h2>
        <div id="slice-summary" class="note"></div>
        <div class="chart-grid">
            <div class="chart-card" id="slice-year"></div>
            <div class="chart-card" id="slice-scatter"></div>
            <div class="chart-card" id="slice-dist"></div>
            <div class="chart-card" id="slice-violin"></div>
            <div class="chart-card wide" id="slice-heatmap"></div>
            <div class="chart-card wide"><canvas id="slice-cloud" width="800" height="400"></canvas></div>
        </div>
        <h3>Bài viết ngoại lai (trên bách phân vị 99)</h3>
        <div id="outlier-note" class="note"></div>
        <div class="table-wrap"><table id="outlier-table"></table></div>
    </section>
</main>
</div>

<script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
<script src="https://unpkg.com/wordcloud@1.2.2/src/wordcloud2.js"></script>
<script>
const $ = (id) => document.getElementById(id);
const status = (msg, isError) => {
    $('status').textContent = msg || '';
    $('status').className = 'status' + (isError ? ' error' : '');
};

function plotlyLayout(spec) {
    return {
        title: { text: spec.title },
        plot_bgcolor: spec.layout.plot_bgcolor,
        paper_bgcolor: spec.layout.paper_bgcolor,
        font: { family: spec.layout.font_family, size: spec.layout.font_size },
        margin: spec.layout.margin,
    };
}

// One renderer per spec kind; the server only ships declarative specs.
function renderSpec(spec, el) {
    const node = $(el);
    if (!spec) { node.innerHTML = '<p class="empty">Không đủ dữ liệu.</p>'; return; }
    const layout = plotlyLayout(spec);
    let traces = [];

    if (spec.kind === 'bar') {
        const horizontal = spec.orientation === 'horizontal';
        traces = [{
            type: 'bar',
            orientation: horizontal ? 'h' : 'v',
            x: horizontal ? spec.values : spec.categories,
            y: horizontal ? spec.categories : spec.values,
            text: spec.values.map(String),
            textposition: spec.text_position,
            marker: { color: spec.values, colorscale: spec.color_scale },
        }];
        if (spec.category_order) {
            layout[horizontal ? 'yaxis' : 'xaxis'] = { categoryorder: spec.category_order };
        }
    } else if (spec.kind === 'histogram') {
        traces = [{ type: 'histogram', x: spec.values, nbinsx: spec.bins,
                    marker: { color: spec.bar_color } }];
        layout.bargap = spec.bar_gap;
        if (spec.log_y) {
            layout.yaxis = { type: 'log', tickmode: 'array',
                             tickvals: spec.y_ticks.values, ticktext: spec.y_ticks.labels };
        }
    } else if (spec.kind === 'scatter') {
        traces = [{ type: 'scatter', mode: 'markers', x: spec.x, y: spec.y,
                    text: spec.hover, hoverinfo: 'text',
                    marker: { color: spec.color, colorscale: spec.color_scale } }];
    } else if (spec.kind === 'violin') {
        traces = [{ type: 'violin', y: spec.values,
                    box: { visible: spec.show_box },
                    points: spec.show_points ? 'all' : false }];
    } else if (spec.kind === 'heatmap') {
        traces = [{ type: 'heatmap', z: spec.matrix, x: spec.columns, y: spec.rows,
                    colorscale: spec.color_scale }];
    }
    Plotly.newPlot(node, traces, layout, { displayModeBar: false, responsive: true });
}

function renderCloud(spec, canvasId) {
    const canvas = $(canvasId);
    const ctx = canvas.getContext('2d');
    ctx.clearRect(0, 0, canvas.width, canvas.height);
    if (!spec) {
        ctx.fillStyle = '#888';
        ctx.font = '14px Arial';
        ctx.fillText('Không đủ dữ liệu text để tạo WordCloud.', 20, 30);
        return;
    }
    WordCloud(canvas, {
        list: spec.tokens,
        backgroundColor: spec.background,
        weightFactor: (w) => 8 + Math.log2(w + 1) * 6,
        shuffle: false,
    });
}

async function getJson(url) {
    const res = await fetch(url);
    const body = await res.json();
    if (!res.ok) { throw new Error(body.error || ('HTTP ' + res.status)); }
    return body;
}

const selection = () => ({ db: $('db-select').value, coll: $('coll-select').value });

async function loadDatabases() {
    const data = await getJson('/api/databases');
    $('db-select').innerHTML = data.databases.map(d => `<option>${d}</option>`).join('');
    await loadCollections();
}

async function loadCollections() {
    const db = $('db-select').value;
    if (!db) { return; }
    const data = await getJson(`/api/databases/${encodeURIComponent(db)}/collections`);
    $('coll-select').innerHTML = data.collections.map(c => `<option>${c}</option>`).join('');
}

async function runOverview() {
    const { db, coll } = selection();
    if (!db || !coll) { return; }
    status('Đang xử lý toàn bộ collection...');
    try {
        const outliers = $('outliers-toggle').checked;
        const data = await getJson(`/api/overview?db=${encodeURIComponent(db)}&coll=${encodeURIComponent(coll)}&outliers=${outliers}`);
        $('kpi-total').textContent = data.kpi.total_docs.toLocaleString();
        $('kpi-year').textContent = data.kpi.latest_year || '–';
        $('kpi-max').textContent = data.kpi.max_len.toLocaleString();
        renderSpec(data.charts.year_trend, 'chart-year');
        renderSpec(data.charts.top_10, 'chart-top10');
        renderSpec(data.charts.distribution, 'chart-dist');
        renderCloud(data.word_cloud, 'cloud-canvas');
        await loadTable();
        status('Dữ liệu đã sẵn sàng!');
    } catch (e) { status(e.message, true); }
}

async function loadTable() {
    const { db, coll } = selection();
    const q = $('search-input').value;
    const colsRaw = $('cols-input').value.trim();
    let url = `/api/overview/table?db=${encodeURIComponent(db)}&coll=${encodeURIComponent(coll)}&q=${encodeURIComponent(q)}`;
    if (colsRaw) { url += `&cols=${encodeURIComponent(colsRaw)}`; }
    try {
        const data = await getJson(url);
        $('table-note').textContent = `Tìm thấy ${data.matched} / ${data.total} kết quả.`;
        const head = '<tr>' + data.columns.map(c => `<th>${c}</th>`).join('') + '</tr>';
        const rows = data.rows.slice(0, 500).map(r =>
            '<tr>' + data.columns.map(c => `<td>${r[c] ?? ''}</td>`).join('') + '</tr>'
        ).join('');
        $('data-table').innerHTML = head + rows;
    } catch (e) {
        $('table-note').textContent = e.message;
        $('data-table').innerHTML = '';
    }
}

async function runSlice() {
    const { db, coll } = selection();
    if (!db || !coll) { return; }
    status('Đang tải slice gần nhất...');
    try {
        const limit = $('limit-input').value;
        const outliers = $('outliers-toggle').checked;
        const data = await getJson(`/api/slice?db=${encodeURIComponent(db)}&coll=${encodeURIComponent(coll)}&limit=${limit}&outliers=${outliers}`);
        if (data.record_count === 0) {
            $('slice-summary').textContent = 'Không có dữ liệu.';
        } else if (data.summary) {
            const s = data.summary;
            $('slice-summary').textContent =
                `${s.count} bài — trung bình ${s.mean.toFixed(1)} từ, trung vị ${s.median.toFixed(1)}, ` +
                `min ${s.min}, max ${s.max}` + (s.std != null ? `, độ lệch chuẩn ${s.std.toFixed(1)}` : '');
        }
        renderSpec(data.charts.year_trend, 'slice-year');
        renderSpec(data.charts.scatter, 'slice-scatter');
        renderSpec(data.charts.distribution, 'slice-dist');
        renderSpec(data.charts.violin, 'slice-violin');
        renderSpec(data.charts.heatmap, 'slice-heatmap');
        renderCloud(data.word_cloud, 'slice-cloud');

        if (data.outliers && data.outliers.rows.length > 0) {
            $('outlier-note').textContent = `Ngưỡng: ${data.outliers.threshold.toFixed(2)} từ.`;
            const rows = data.outliers.rows.map(r =>
                `<tr><td>${r.title}</td><td>${r.word_count.toLocaleString()}</td><td>${r.year ?? ''}</td></tr>`
            ).join('');
            $('outlier-table').innerHTML = '<tr><th>title</th><th>word_count</th><th>year</th></tr>' + rows;
        } else {
            $('outlier-note').textContent = 'Không có bài viết ngoại lai.';
            $('outlier-table').innerHTML = '';
        }
        status('');
    } catch (e) { status(e.message, true); }
}

$('db-select').addEventListener('change', loadCollections);
$('coll-select').addEventListener('change', runSlice);
$('run-overview').addEventListener('click', runOverview);
$('run-slice').addEventListener('click', runSlice);
$('search-input').addEventListener('change', loadTable);
$('cols-input').addEventListener('change', loadTable);
$('reload').addEventListener('click', async () => {
    await fetch('/api/reload', { method: 'POST' });
    status('Cache đã được xóa. Kích hoạt lại để tính toán mới.');
});

loadDatabases().catch(e => status(e.message, true));
</script>
"#;

    build_page("BigData Analytics", content)
}

fn build_page(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="vi">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} — Wikiscope</title>
<style>
*{{margin:0;padding:0;box-sizing:border-box;}}
body{{font-family:Arial,-apple-system,BlinkMacSystemFont,"Segoe UI",sans-serif;color:#1a1a1a;background:#fafafa;font-size:14px;}}
.header{{background:#1a1a1a;color:#fff;padding:12px 24px;}}
.header h1{{font-size:18px;font-weight:600;}}
.layout{{display:flex;min-height:calc(100vh - 48px);}}
.sidebar{{width:260px;background:#fff;border-right:1px solid #e0e0e0;padding:16px;flex-shrink:0;}}
.sidebar h2{{font-size:15px;margin-bottom:12px;}}
.sidebar label{{display:block;font-size:12px;color:#666;margin:10px 0 4px;}}
.sidebar label.check{{display:flex;gap:6px;align-items:center;font-size:13px;color:#333;}}
.sidebar select,.sidebar input[type=number],.sidebar input[type=text]{{width:100%;padding:6px;border:1px solid #ccc;border-radius:4px;}}
.sidebar button{{width:100%;margin-top:10px;padding:8px;border:none;border-radius:4px;background:#e0e0e0;cursor:pointer;font-size:13px;}}
.sidebar button.primary{{background:#0066cc;color:#fff;font-weight:600;}}
.sidebar button.ghost{{background:transparent;border:1px solid #ccc;}}
.sidebar hr{{margin:14px 0;border:none;border-top:1px solid #eee;}}
.status{{margin-top:10px;font-size:12px;color:#2e7d32;min-height:16px;}}
.status.error{{color:#c62828;}}
.content{{flex:1;padding:20px;max-width:1200px;}}
.content h2{{font-size:17px;margin:8px 0 12px;}}
.content h3{{font-size:14px;margin:20px 0 8px;}}
.kpi-row{{display:flex;gap:12px;margin-bottom:16px;}}
.kpi{{flex:1;background:#fff;border:1px solid #e0e0e0;border-radius:8px;padding:12px;}}
.kpi-label{{font-size:12px;color:#888;}}
.kpi-value{{font-size:22px;font-weight:600;}}
.chart-grid{{display:grid;grid-template-columns:1fr 1fr;gap:12px;}}
.chart-card{{background:#fff;border:1px solid #e0e0e0;border-radius:8px;padding:8px;min-height:320px;}}
.chart-card.wide{{grid-column:span 2;}}
.chart-card canvas{{max-width:100%;}}
.empty{{color:#888;text-align:center;padding:40px 0;}}
.table-controls{{display:flex;gap:8px;margin-bottom:8px;}}
.table-controls input{{flex:1;padding:6px;border:1px solid #ccc;border-radius:4px;}}
.note{{font-size:12px;color:#666;margin-bottom:6px;}}
.table-wrap{{max-height:420px;overflow:auto;background:#fff;border:1px solid #e0e0e0;border-radius:8px;}}
table{{width:100%;border-collapse:collapse;font-size:13px;}}
th,td{{text-align:left;padding:6px 10px;border-bottom:1px solid #eee;white-space:nowrap;max-width:420px;overflow:hidden;text-overflow:ellipsis;}}
th{{position:sticky;top:0;background:#f5f5f5;}}
section{{margin-bottom:32px;}}
</style>
</head>
<body>
<div class="header"><h1>BigData Analytics: Wikipedia</h1></div>
{content}
</body>
</html>"#,
        title = html_escape(title),
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
