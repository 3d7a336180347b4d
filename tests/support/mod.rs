//! Shared helpers for integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Writes `files` (relative path, content) under a fresh temp directory
pub fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    write_files(dir.path(), files);
    dir
}

pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, content).expect("Failed to write fixture file");
    }
}

/// Canonical path, so roots compare equal on platforms with symlinked temp dirs
pub fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().expect("Failed to canonicalize")
}

pub const REACT_LIBRARY: &[(&str, &str)] = &[
    (
        "package.json",
        r#"{"name":"ui-kit","dependencies":{"react":"^18.2.0","react-dom":"^18.2.0"},"devDependencies":{"@vitejs/plugin-react":"^4.0.0"}}"#,
    ),
    ("src/Button.tsx", "export const Button = () => null;\n"),
    ("src/App.jsx", "export const App = () => null;\n"),
    ("components/Card.tsx", "export const Card = () => null;\n"),
    ("vite.config.ts", "export default {};\n"),
];

pub const VUE3_LIBRARY: &[(&str, &str)] = &[
    (
        "package.json",
        r#"{"name":"vue-widgets","dependencies":{"vue":"^3.3.0"},"devDependencies":{"@vitejs/plugin-vue":"^5.0.0","@vue/compiler-sfc":"^3.3.0","@vue/runtime-dom":"^3.3.0"}}"#,
    ),
    ("src/App.vue", "<template><div /></template>\n"),
    ("lib/Widget.vue", "<template><span /></template>\n"),
    ("components/Btn.vue", "<template><button /></template>\n"),
    ("vite.config.ts", "export default {};\n"),
];

pub const VUE2_LIBRARY: &[(&str, &str)] = &[
    (
        "package.json",
        r#"{"name":"legacy-widgets","dependencies":{"vue":"^2.7.0"},"devDependencies":{"vue-template-compiler":"^2.7.0","@vue/cli-service":"^5.0.0","vue-loader":"^15.0.0"}}"#,
    ),
    ("src/App.vue", "<template><div /></template>\n"),
    ("lib/Widget.vue", "<template><span /></template>\n"),
    ("components/Btn.vue", "<template><button /></template>\n"),
    ("vue.config.js", "module.exports = {};\n"),
];

pub const SVELTE_LIBRARY: &[(&str, &str)] = &[
    (
        "package.json",
        r#"{"name":"svelte-bits","svelte":"src/index.js","devDependencies":{"svelte":"^4.0.0","@sveltejs/rollup-plugin-svelte":"^7.0.0"}}"#,
    ),
    ("src/Button.svelte", "<button><slot /></button>\n"),
    ("lib/Card.svelte", "<div><slot /></div>\n"),
    ("svelte.config.js", "export default {};\n"),
];

pub const STYLE_LIBRARY: &[(&str, &str)] = &[
    (
        "package.json",
        r#"{"name":"theme","style":"dist/index.css","sass":"src/vars.scss","devDependencies":{"less":"^4.0.0","sass":"^1.69.0","stylus":"^0.62.0","postcss":"^8.4.0"}}"#,
    ),
    ("src/base.css", "body { margin: 0; }\n"),
    ("src/theme.less", "@primary: #333;\n"),
    ("src/vars.scss", "$primary: #333;\n"),
    ("src/mixins.sass", "=flex\n  display: flex\n"),
    ("src/grid.styl", "grid()\n  display grid\n"),
    ("styles/reset.css", "* { box-sizing: border-box; }\n"),
    ("postcss.config.js", "module.exports = {};\n"),
];

pub const TYPESCRIPT_LIBRARY: &[(&str, &str)] = &[
    (
        "package.json",
        r#"{"name":"utils","types":"dist/index.d.ts","typings":"dist/index.d.ts","devDependencies":{"typescript":"^5.3.0","@types/node":"^20.0.0"}}"#,
    ),
    ("index.ts", "export * from './src/index';\n"),
    ("src/index.ts", "export const add = (a: number, b: number) => a + b;\n"),
    ("lib/helpers.ts", "export const noop = () => {};\n"),
    ("tsconfig.json", "{}\n"),
    ("tsconfig.build.json", "{}\n"),
];

pub const NEXT_APP: &[(&str, &str)] = &[
    (
        "package.json",
        r#"{"name":"site","dependencies":{"next":"^14.0.0","react":"^18.2.0","react-dom":"^18.2.0"}}"#,
    ),
    ("app/layout.tsx", "export default function Layout() { return null; }\n"),
    ("pages/_app.tsx", "export default function App() { return null; }\n"),
    ("pages/index.tsx", "export default function Home() { return null; }\n"),
    ("next.config.js", "module.exports = {};\n"),
];
