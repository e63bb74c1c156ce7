use serde::Serialize;
use trellis_core::{reactive, signal};
use trellis_dom::*;

#[derive(Clone, Serialize)]
struct Todo {
    title: String,
    done: bool,
}

fn app(todos: trellis_core::Store<Vec<Todo>>) -> Descriptor {
    let count = signal(0i32);
    let show_list = signal(true);

    Element("main")
        .id("app")
        .css(StyleSheet::new().rule(".done", "text-decoration: line-through"))
        .child(Element("p").id("count").text(dynamic({
            let count = count.clone();
            move || format!("Count: {}", count.get())
        })))
        .child(Element("button").id("inc").text("Increment").on("click", {
            let count = count.clone();
            move |_| count.update(|c| *c += 1)
        }))
        .child(Element("button").id("dec").text("Decrement").on("click", {
            let count = count.clone();
            move |_| count.update(|c| *c -= 1)
        }))
        .child(Element("button").id("toggle").text("Toggle list").on("click", {
            let show_list = show_list.clone();
            move |_| show_list.update(|v| *v = !*v)
        }))
        .child(
            Element("ul").dom_if(&show_list).list(MapList::new(todos, |todo: &Todo, _| {
                Element("li")
                    .class(if todo.done { "done" } else { "" })
                    .text(todo.title.clone())
                    .into()
            })),
        )
}

fn click(doc: &Document, selector: &str) -> anyhow::Result<()> {
    let node = doc
        .query(selector)?
        .ok_or_else(|| anyhow::anyhow!("nothing matches {selector}"))?;
    doc.dispatch(node, "click", serde_json::Value::Null);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let doc = Document::new();
    let renderer = Renderer::new(doc.clone());
    let todos = reactive(vec![Todo {
        title: "write the renderer".into(),
        done: true,
    }]);

    let root = renderer.render(app(todos.clone()));
    root.try_mount("body")?;
    println!("{}", doc.to_html(doc.body()));

    click(&doc, "#inc")?;
    click(&doc, "#inc")?;
    click(&doc, "#dec")?;
    todos.push(Todo {
        title: "ship it".into(),
        done: false,
    });
    println!("{}", doc.to_html(doc.body()));

    click(&doc, "#toggle")?;
    println!("{}", doc.to_html(doc.body()));

    let done = root.unmount();
    log::info!("unmounted, settled = {}", done.is_settled());
    Ok(())
}
