//! Build-target taxonomy for library packages

use super::taxonomy::{CategoryProfile, Compatibility, SupportLevel::*, Taxonomy};
use crate::category::LibraryType;
use serde_json::json;

const VITE_CONFIGS: &[&str] = &["vite.config.ts", "vite.config.js"];
const VUE_FILES: &[&str] = &["src/**/*.vue", "lib/**/*.vue", "components/**/*.vue"];
const JSX_FILES: &[&str] = &["src/**/*.jsx", "src/**/*.tsx"];

impl Taxonomy<LibraryType> {
    /// The library taxonomy keyed on `package.json`, falling back to `mixed`
    pub fn library() -> Self {
        Taxonomy::new("library", "package.json", LibraryType::Mixed)
            .with_profile(
                CategoryProfile::new(LibraryType::TypeScript)
                    .multiplier(0.8)
                    .priority(6)
                    .files(&[
                        "src/**/*.ts",
                        "src/**/*.tsx",
                        "lib/**/*.ts",
                        "lib/**/*.tsx",
                        "index.ts",
                        "main.ts",
                    ])
                    .dependencies(&["typescript", "@types/node"])
                    .configs(&["tsconfig.json", "tsconfig.build.json"])
                    .manifest_fields(&["types", "typings"])
                    .excludes(&["**/*.js", "**/*.jsx"])
                    .recommended(json!({
                        "output": { "format": ["esm", "cjs"], "sourcemap": true },
                        "typescript": { "declaration": true, "isolatedDeclarations": true },
                        "external": [],
                        "bundleless": false
                    }))
                    .compatibility(Compatibility::new(Excellent, Excellent, true, true, true))
                    .plugins(&["typescript", "dts"]),
            )
            .with_profile(
                CategoryProfile::new(LibraryType::Style)
                    .multiplier(0.9)
                    .priority(8)
                    .files(&[
                        "src/**/*.css",
                        "src/**/*.less",
                        "src/**/*.scss",
                        "src/**/*.sass",
                        "src/**/*.styl",
                        "lib/**/*.css",
                        "styles/**/*",
                    ])
                    .dependencies(&["less", "sass", "stylus", "postcss"])
                    .configs(&["postcss.config.js", ".stylelintrc"])
                    .manifest_fields(&["style", "sass", "less"])
                    .excludes(&["**/*.ts", "**/*.tsx", "**/*.js", "**/*.jsx", "**/*.vue"])
                    .recommended(json!({
                        "output": { "format": ["esm"], "sourcemap": false },
                        "style": { "extract": true, "minimize": true, "autoprefixer": true },
                        "external": [],
                        "bundleless": true
                    }))
                    .compatibility(Compatibility::new(Good, Good, false, false, true))
                    .plugins(&["postcss", "less", "sass", "stylus"]),
            )
            .with_profile(
                CategoryProfile::new(LibraryType::Vue2)
                    .multiplier(0.95)
                    .priority(10)
                    .files(VUE_FILES)
                    .dependencies(&[
                        "vue@^2",
                        "@vue/composition-api",
                        "vue-template-compiler",
                        "@vue/cli-service",
                        "vue-loader",
                    ])
                    .configs(&["vue.config.js"])
                    .recommended(vue_recommended(2))
                    .compatibility(Compatibility::new(Excellent, Good, true, true, false))
                    .plugins(&["vue2", "vue-jsx", "typescript", "postcss"]),
            )
            .with_profile(
                CategoryProfile::new(LibraryType::Vue3)
                    .multiplier(0.95)
                    .priority(10)
                    .files(VUE_FILES)
                    .dependencies(&[
                        "vue@^3",
                        "@vue/runtime-core",
                        "@vue/runtime-dom",
                        "@vitejs/plugin-vue",
                        "@vue/compiler-sfc",
                    ])
                    .configs(VITE_CONFIGS)
                    .recommended(vue_recommended(3))
                    .compatibility(Compatibility::new(Excellent, Excellent, true, true, false))
                    .plugins(&["vue3", "vue-jsx", "typescript", "postcss"]),
            )
            .with_profile(
                CategoryProfile::new(LibraryType::React)
                    .multiplier(0.95)
                    .priority(10)
                    .files(&[
                        "src/**/*.tsx",
                        "src/**/*.jsx",
                        "lib/**/*.tsx",
                        "components/**/*.tsx",
                    ])
                    .dependencies(&["react", "react-dom", "@vitejs/plugin-react"])
                    .configs(VITE_CONFIGS)
                    .recommended(component_recommended(&["react", "react-dom"]))
                    .compatibility(Compatibility::new(Excellent, Excellent, true, true, false))
                    .plugins(&["react", "typescript", "postcss", "dts"]),
            )
            .with_profile(
                CategoryProfile::new(LibraryType::Svelte)
                    .multiplier(0.95)
                    .priority(9)
                    .files(&[
                        "src/**/*.svelte",
                        "lib/**/*.svelte",
                        "components/**/*.svelte",
                    ])
                    .dependencies(&["svelte", "@sveltejs/rollup-plugin-svelte"])
                    .configs(&["svelte.config.js", "svelte.config.cjs"])
                    .manifest_fields(&["svelte"])
                    .recommended(component_recommended(&["svelte"]))
                    .compatibility(Compatibility::new(Excellent, Good, true, true, false))
                    .plugins(&["svelte", "postcss", "dts"]),
            )
            .with_profile(
                CategoryProfile::new(LibraryType::Solid)
                    .multiplier(0.9)
                    .priority(9)
                    .files(JSX_FILES)
                    .dependencies(&["solid-js", "rollup-plugin-solid", "vite-plugin-solid"])
                    .configs(VITE_CONFIGS)
                    .recommended(component_recommended(&["solid-js"]))
                    .compatibility(Compatibility::new(Good, Good, true, true, false))
                    .plugins(&["solid", "typescript", "postcss", "dts"]),
            )
            .with_profile(
                CategoryProfile::new(LibraryType::Preact)
                    .multiplier(0.9)
                    .priority(9)
                    .files(JSX_FILES)
                    .dependencies(&["preact", "@preact/preset-vite"])
                    .configs(VITE_CONFIGS)
                    .recommended(component_recommended(&["preact"]))
                    .compatibility(Compatibility::new(Excellent, Good, true, true, false))
                    .plugins(&["preact", "typescript", "postcss", "dts"]),
            )
            .with_profile(
                CategoryProfile::new(LibraryType::Lit)
                    .multiplier(0.85)
                    .priority(8)
                    .files(&["src/**/*.ts", "src/**/*.js", "src/**/*.css"])
                    .dependencies(&["lit"])
                    .recommended(component_recommended(&["lit"]))
                    .compatibility(Compatibility::new(Excellent, Good, true, true, false))
                    .plugins(&["typescript", "postcss", "dts"]),
            )
            .with_profile(
                CategoryProfile::new(LibraryType::Angular)
                    .multiplier(0.8)
                    .priority(7)
                    .files(&["projects/**/*.ts", "src/**/*.ts"])
                    .dependencies(&["@angular/core", "@angular/common", "ng-packagr"])
                    .configs(&["ng-package.json", "angular.json"])
                    .recommended(component_recommended(&["@angular/core", "@angular/common"]))
                    .compatibility(Compatibility::new(Fair, Fair, true, true, false))
                    .plugins(&["typescript", "dts"]),
            )
            .with_profile(
                CategoryProfile::new(LibraryType::Mixed)
                    .multiplier(0.6)
                    .priority(2)
                    .files(&["src/**/*.{ts,tsx,vue,css,less,scss}"])
                    .recommended(json!({
                        "output": { "format": ["esm", "cjs"], "sourcemap": true },
                        "typescript": { "declaration": true },
                        "style": { "extract": true },
                        "external": [],
                        "bundleless": false
                    }))
                    .compatibility(Compatibility::new(Good, Good, true, true, false))
                    .plugins(&["typescript", "vue3", "postcss", "dts"]),
            )
    }
}

fn vue_recommended(version: u8) -> serde_json::Value {
    json!({
        "output": { "format": ["esm", "cjs", "umd"], "sourcemap": true },
        "vue": { "version": version, "onDemand": true },
        "external": ["vue"],
        "globals": { "vue": "Vue" },
        "bundleless": false
    })
}

fn component_recommended(external: &[&str]) -> serde_json::Value {
    json!({
        "output": { "format": ["esm", "cjs"], "sourcemap": true },
        "external": external,
        "bundleless": false
    })
}
