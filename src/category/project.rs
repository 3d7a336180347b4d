crate::define_category! {
    /// Application category as seen by the dev-server launcher
    ProjectType {
        Vue2 => "vue2" : "Vue 2",
        Vue3 => "vue3" : "Vue 3" | "vue" | "nuxt",
        React => "react" : "React",
        ReactNext => "react-next" : "Next.js" | "next",
        Lit => "lit" : "Lit",
        Svelte => "svelte" : "Svelte" | "sveltekit",
        Angular => "angular" : "Angular",
        Html => "html" : "HTML" | "native-html",
        VanillaTs => "vanilla-ts" : "Vanilla TypeScript",
        Vanilla => "vanilla" : "Vanilla JavaScript",
    }
}
