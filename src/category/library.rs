crate::define_category! {
    /// Build-target category of a library package
    LibraryType {
        TypeScript => "typescript" : "TypeScript" | "ts",
        Style => "style" : "Style" | "css",
        Vue2 => "vue2" : "Vue 2",
        Vue3 => "vue3" : "Vue 3" | "vue",
        React => "react" : "React",
        Svelte => "svelte" : "Svelte",
        Solid => "solid" : "Solid" | "solid-js",
        Preact => "preact" : "Preact",
        Lit => "lit" : "Lit" | "web-components",
        Angular => "angular" : "Angular",
        Mixed => "mixed" : "Mixed",
    }
}

impl LibraryType {
    /// Whether the category compiles framework components (as opposed to
    /// plain TypeScript or stylesheets)
    pub fn is_component_framework(&self) -> bool {
        !matches!(self, Self::TypeScript | Self::Style | Self::Mixed)
    }
}
