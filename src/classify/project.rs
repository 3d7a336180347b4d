//! Application taxonomy used when launching a dev server

use super::taxonomy::{CategoryProfile, Taxonomy};
use crate::category::ProjectType;
use serde_json::json;

const VITE_CONFIGS: &[&str] = &["vite.config.ts", "vite.config.js", "vite.config.mjs"];

impl Taxonomy<ProjectType> {
    /// The dev-server taxonomy keyed on `package.json`, falling back to `vanilla`
    pub fn project() -> Self {
        Taxonomy::new("project", "package.json", ProjectType::Vanilla)
            .with_profile(
                CategoryProfile::new(ProjectType::Vue2)
                    .multiplier(0.95)
                    .priority(10)
                    .files(&["src/App.vue", "src/**/*.vue", "src/main.js"])
                    .dependencies(&["vue@^2", "vue-template-compiler", "@vitejs/plugin-vue2"])
                    .configs(&["vue.config.js", "vue.config.ts"])
                    .recommended(dev_server(5173))
                    .plugins(&["@vitejs/plugin-vue2"]),
            )
            .with_profile(
                CategoryProfile::new(ProjectType::Vue3)
                    .multiplier(0.95)
                    .priority(10)
                    .files(&["src/App.vue", "app.vue", "pages/index.vue", "src/**/*.vue"])
                    .dependencies(&["vue@^3", "@vitejs/plugin-vue", "nuxt", "quasar"])
                    .configs(&["nuxt.config.ts", "nuxt.config.js", "quasar.config.js"])
                    .recommended(dev_server(5173))
                    .plugins(&["@vitejs/plugin-vue"]),
            )
            .with_profile(
                CategoryProfile::new(ProjectType::ReactNext)
                    .multiplier(0.95)
                    .priority(11)
                    .files(&["app/layout.tsx", "pages/_app.tsx", "pages/**/*.tsx"])
                    .dependencies(&["next", "react", "react-dom"])
                    .configs(&["next.config.js", "next.config.ts", "next.config.mjs"])
                    .recommended(dev_server(3000))
                    .plugins(&["@vitejs/plugin-react"]),
            )
            .with_profile(
                CategoryProfile::new(ProjectType::React)
                    .multiplier(0.95)
                    .priority(10)
                    .files(&["src/App.jsx", "src/App.tsx", "src/index.jsx", "src/index.tsx"])
                    .dependencies(&["react", "react-dom", "@vitejs/plugin-react"])
                    .configs(VITE_CONFIGS)
                    .recommended(dev_server(5173))
                    .plugins(&["@vitejs/plugin-react"]),
            )
            .with_profile(
                CategoryProfile::new(ProjectType::Svelte)
                    .multiplier(0.95)
                    .priority(9)
                    .files(&["src/App.svelte", "src/routes/+page.svelte", "src/**/*.svelte"])
                    .dependencies(&["svelte", "@sveltejs/kit", "@sveltejs/vite-plugin-svelte"])
                    .configs(&["svelte.config.js"])
                    .recommended(dev_server(5173))
                    .plugins(&["@sveltejs/vite-plugin-svelte"]),
            )
            .with_profile(
                CategoryProfile::new(ProjectType::Lit)
                    .multiplier(0.85)
                    .priority(8)
                    .files(&["src/my-element.ts", "src/my-element.js", "src/components/*.ts"])
                    .dependencies(&["lit", "lit-element", "@lit/reactive-element"])
                    .recommended(dev_server(5173))
                    .plugins(&["@vitejs/plugin-lit"]),
            )
            .with_profile(
                CategoryProfile::new(ProjectType::Angular)
                    .multiplier(0.8)
                    .priority(7)
                    .files(&["src/app/app.component.ts", "src/main.ts"])
                    .dependencies(&["@angular/core", "@angular/common"])
                    .configs(&["angular.json"])
                    .recommended(dev_server(4200)),
            )
            .with_profile(
                CategoryProfile::new(ProjectType::Html)
                    .multiplier(0.7)
                    .priority(4)
                    .files(&["index.html", "src/index.html", "public/index.html", "src/style.css"])
                    .recommended(dev_server(5173)),
            )
            .with_profile(
                CategoryProfile::new(ProjectType::VanillaTs)
                    .multiplier(0.7)
                    .priority(3)
                    .files(&["src/main.ts", "src/**/*.ts"])
                    .dependencies(&["typescript"])
                    .configs(&["tsconfig.json"])
                    .recommended(dev_server(5173))
                    .plugins(&["@vitejs/plugin-typescript"]),
            )
            .with_profile(
                CategoryProfile::new(ProjectType::Vanilla)
                    .multiplier(0.6)
                    .priority(1)
                    .files(&["src/main.js", "src/**/*.js"])
                    .recommended(dev_server(5173)),
            )
    }
}

fn dev_server(port: u16) -> serde_json::Value {
    json!({ "server": { "port": port, "host": "localhost", "open": false } })
}
