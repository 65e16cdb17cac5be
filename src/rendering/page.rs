//! The single HTML page. Every control posts one JSON event to `/events` and
//! applies whichever outputs come back; absent outputs are left alone.

const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Audio Spectrogram Viewer</title>
<script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
<style>
  body { font-family: sans-serif; text-align: center; margin: 0 2em; }
  button { font-size: 20px; margin: 6px; }
  input[type=number] { font-size: 18px; width: 8em; }
  audio { width: 90%; }
  #status { color: #c0392b; min-height: 1.5em; }
  .hidden { display: none; }
</style>
</head>
<body>
<h1>Audio Spectrogram Viewer</h1>

<div>
  <input type="file" id="upload-input" accept="audio/*" class="hidden">
  <button id="upload-audio">Upload Audio File</button>
</div>
<div id="status"></div>

<div id="audio-player"><audio id="audio-element" controls class="hidden"></audio></div>
<div id="spectrogram"></div>
<button id="move-line-button">Move Line and Play Audio</button>

<h2>Selection</h2>
<div>
  <label>Start (s) <input type="number" id="start-field" step="0.01" min="0"></label>
  <label>End (s) <input type="number" id="end-field" step="0.01" min="0"></label>
  <button id="confirm-range">Confirm Range</button>
</div>
<p>Or draw a rectangle on the spectrogram above.</p>

<div id="clip-player"><audio id="clip-audio-element" controls class="hidden"></audio></div>
<div id="clip-spectrogram"></div>
<button id="play-clip-button">Move Line and Play Selection</button>

<script>
const TICK_MS = __TICK_MS__;
const CURSOR_TRACE = __CURSOR_TRACE__;
let ticker = null;
let tickInFlight = false;
let cursorTarget = 'full';

function setStatus(text) {
  document.getElementById('status').textContent = text;
}

async function send(event) {
  let resp;
  try {
    resp = await fetch('/events', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(event),
    });
  } catch (err) {
    setStatus('Server unreachable: ' + err);
    setTicking(false);
    return;
  }
  const body = await resp.json().catch(() => ({ error: resp.statusText }));
  if (!resp.ok) {
    setStatus(body.error || resp.statusText);
    return;
  }
  setStatus('');
  apply(body);
}

function setAudio(id, src) {
  const el = document.getElementById(id);
  if (src) {
    el.src = src;
    el.classList.remove('hidden');
  } else {
    el.pause();
    el.removeAttribute('src');
    el.classList.add('hidden');
  }
}

function drawFigure(id, figure) {
  Plotly.react(id, figure.data, figure.layout, { modeBarButtonsToAdd: ['drawrect', 'eraseshape'] });
}

function cursorDiv() {
  return cursorTarget === 'clip' ? 'clip-spectrogram' : 'spectrogram';
}

function moveCursor(x) {
  const div = document.getElementById(cursorDiv());
  if (div && div.data && div.data.length > CURSOR_TRACE) {
    Plotly.restyle(div, { x: [[x, x]] }, [CURSOR_TRACE]);
  }
}

function setTicking(on) {
  if (on && ticker === null) {
    ticker = setInterval(async () => {
      if (tickInFlight) return;
      tickInFlight = true;
      try { await send({ type: 'tick' }); } finally { tickInFlight = false; }
    }, TICK_MS);
  } else if (!on && ticker !== null) {
    clearInterval(ticker);
    ticker = null;
  }
}

function apply(out) {
  if ('audio_player' in out) setAudio('audio-element', out.audio_player);
  if ('clip_player' in out) setAudio('clip-audio-element', out.clip_player);
  if ('spectrogram' in out) drawFigure('spectrogram', out.spectrogram);
  if ('clip_spectrogram' in out) drawFigure('clip-spectrogram', out.clip_spectrogram);
  if ('start_field' in out) document.getElementById('start-field').value = out.start_field.toFixed(3);
  if ('end_field' in out) document.getElementById('end-field').value = out.end_field.toFixed(3);
  if ('play' in out) {
    cursorTarget = out.play;
    const el = document.getElementById(out.play === 'clip' ? 'clip-audio-element' : 'audio-element');
    if (el.src) { el.currentTime = 0; el.play(); }
  }
  if ('cursor' in out) moveCursor(out.cursor.position);
  if ('interval_disabled' in out) setTicking(!out.interval_disabled);
}

document.getElementById('upload-audio').onclick = () => document.getElementById('upload-input').click();
document.getElementById('upload-input').onchange = (ev) => {
  const file = ev.target.files[0];
  if (!file) return;
  const reader = new FileReader();
  reader.onload = () => send({ type: 'upload', contents: reader.result });
  reader.readAsDataURL(file);
  ev.target.value = '';
};
document.getElementById('move-line-button').onclick = () => send({ type: 'play', target: 'full' });
document.getElementById('play-clip-button').onclick = () => send({ type: 'play', target: 'clip' });
document.getElementById('confirm-range').onclick = () => send({
  type: 'confirm_range',
  start: document.getElementById('start-field').value,
  end: document.getElementById('end-field').value,
});
for (const field of ['start', 'end']) {
  document.getElementById(field + '-field').addEventListener('change', (ev) =>
    send({ type: 'edit_field', field: field, value: ev.target.value }));
}

Plotly.newPlot('spectrogram', [], { xaxis: { title: { text: 'Time (s)' } }, yaxis: { title: { text: 'Frequency (Hz)' } } });
document.getElementById('spectrogram').on('plotly_relayout', (ev) => {
  if (!ev.shapes || ev.shapes.length === 0) return;
  const shape = ev.shapes[ev.shapes.length - 1];
  if (shape.type !== 'rect') return;
  send({ type: 'draw_rect', x0: Number(shape.x0), x1: Number(shape.x1) });
});
</script>
</body>
</html>
"##;

/// The visualization page, polling ticks every `tick_interval_ms` while the
/// cursor is moving.
pub fn render_page(tick_interval_ms: u64) -> String {
    PAGE_TEMPLATE
        .replace("__TICK_MS__", &tick_interval_ms.max(1).to_string())
        .replace("__CURSOR_TRACE__", &super::figure::CURSOR_TRACE_INDEX.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_interval_is_substituted() {
        let html = render_page(100);
        assert!(html.contains("const TICK_MS = 100;"));
        assert!(html.contains("const CURSOR_TRACE = 1;"));
        assert!(!html.contains("__"));
    }

    #[test]
    fn confirm_sends_current_field_text() {
        let html = render_page(100);
        assert!(html.contains("start: document.getElementById('start-field').value"));
        assert!(html.contains("end: document.getElementById('end-field').value"));
    }

    #[test]
    fn page_wires_every_event() {
        let html = render_page(250);
        for kind in ["'upload'", "'play'", "'tick'", "'edit_field'", "'confirm_range'", "'draw_rect'"] {
            assert!(html.contains(kind), "missing {kind}");
        }
    }
}
