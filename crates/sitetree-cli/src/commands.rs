//! Subcommand implementations.
//!
//! Read-only commands load the page file directly. Edits go through a
//! [`TreeEditor`] driven by a [`Dispatcher`] over the [`JsonFileBackend`], the
//! same optimistic path an interactive editor uses.

use std::io::Write;

use serde_json::{Value, json};
use sitetree_core::descendants::descendants as collect_descendants;
use sitetree_core::page::validate_slug;
use sitetree_core::path::route as resolve_route;
use sitetree_core::{DeleteStrategy, PageDraft, PageId, PageStore};
use sitetree_runtime::{
    Dispatcher, EditorConfig, EditorMsg, JsonFileBackend, MoveOutcome, RepositoryOp, TreeEditor,
};
use sitetree_widgets::{LayoutOptions, Placement, TreeGuides, TreeLayout, TreeViewState};

use crate::cli::{AddArgs, Cli, MoveArgs};
use crate::error::{CliError, Result};

/// Shared state for one invocation.
pub struct Context {
    backend: JsonFileBackend,
    config: EditorConfig,
    json: bool,
}

impl Context {
    pub fn new(cli: &Cli) -> Result<Self> {
        let config = match &cli.config {
            Some(path) => EditorConfig::load(path)?,
            None => EditorConfig::default(),
        };
        Ok(Self {
            backend: JsonFileBackend::new(cli.store.clone()),
            config,
            json: cli.json,
        })
    }

    fn load(&self) -> Result<PageStore> {
        Ok(self.backend.load()?)
    }

    /// An editor loaded from the page file.
    fn editor(&self) -> Result<(Dispatcher<JsonFileBackend>, TreeEditor)> {
        let mut dispatcher = Dispatcher::new(self.backend.clone());
        let mut editor = TreeEditor::empty(self.config.clone());
        dispatcher.start(&mut editor);
        check_editor(&mut editor)?;
        Ok((dispatcher, editor))
    }
}

fn check_editor(editor: &mut TreeEditor) -> Result<()> {
    match editor.take_error() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn print_json(out: &mut dyn Write, value: &Value) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

fn parent_label(parent: Option<&PageId>) -> String {
    parent.map_or_else(|| "<root>".to_string(), ToString::to_string)
}

fn tree_json(store: &PageStore, parent: Option<&PageId>) -> Vec<Value> {
    store
        .children(parent)
        .into_iter()
        .map(|page| {
            json!({
                "id": page.id,
                "title": page.title,
                "slug": page.slug,
                "order_index": page.order_index,
                "is_active": page.is_active,
                "show_in_menu": page.show_in_menu,
                "children": tree_json(store, Some(&page.id)),
            })
        })
        .collect()
}

pub fn tree(ctx: &Context, ascii: bool, out: &mut dyn Write) -> Result<()> {
    let store = ctx.load()?;
    if ctx.json {
        return print_json(out, &Value::Array(tree_json(&store, None)));
    }
    let options = LayoutOptions {
        gap_height: 0,
        placeholders: false,
        ..ctx.config.layout_options()
    };
    let layout = TreeLayout::new(&store, &TreeViewState::default(), options);
    let guides = if ascii {
        TreeGuides::Ascii
    } else {
        TreeGuides::Unicode
    };
    for line in layout.render_lines(guides, false) {
        if !line.is_empty() {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

pub fn route(ctx: &Context, id: &str, out: &mut dyn Write) -> Result<()> {
    let store = ctx.load()?;
    let id = PageId::new(id);
    let route = resolve_route(&store, &id)?;
    if ctx.json {
        return print_json(out, &json!({ "id": id, "route": route }));
    }
    writeln!(out, "{route}")?;
    Ok(())
}

pub fn descendants(ctx: &Context, id: &str, out: &mut dyn Write) -> Result<()> {
    let store = ctx.load()?;
    let ids = collect_descendants(&store, &PageId::new(id))?;
    if ctx.json {
        return print_json(out, &json!(ids));
    }
    for id in ids {
        writeln!(out, "{id}")?;
    }
    Ok(())
}

pub fn menu(ctx: &Context, out: &mut dyn Write) -> Result<()> {
    let entries = ctx.load()?.menu();
    if ctx.json {
        let entries: Vec<Value> = entries
            .iter()
            .map(|entry| {
                json!({
                    "id": entry.id,
                    "title": entry.title,
                    "route": entry.route,
                    "depth": entry.depth,
                })
            })
            .collect();
        return print_json(out, &Value::Array(entries));
    }
    for entry in entries {
        let indent = "  ".repeat(entry.depth);
        writeln!(out, "{indent}{}  {}", entry.title, entry.route)?;
    }
    Ok(())
}

pub fn add(ctx: &Context, args: AddArgs, out: &mut dyn Write) -> Result<()> {
    validate_slug(&args.slug)?;
    let mut draft = PageDraft::new(args.id.as_str(), args.title, args.slug);
    if let Some(parent) = args.parent {
        draft = draft.under(parent);
    }
    if let Some(position) = args.position {
        draft = draft.at(position);
    }
    let id = draft.id.clone();

    let (mut dispatcher, mut editor) = ctx.editor()?;
    dispatcher.run(&mut editor, EditorMsg::Edit(RepositoryOp::Create(draft)));
    check_editor(&mut editor)?;

    let route = resolve_route(editor.store(), &id)?;
    writeln!(out, "created {id} at {route}")?;
    Ok(())
}

pub fn move_page(ctx: &Context, args: MoveArgs, out: &mut dyn Write) -> Result<()> {
    let page = PageId::new(args.id);
    let parent = match args.parent.as_str() {
        "root" => None,
        "" => return Err(CliError::invalid("--parent must name a page or `root`")),
        id => Some(PageId::new(id)),
    };

    let (mut dispatcher, mut editor) = ctx.editor()?;
    dispatcher.run(
        &mut editor,
        EditorMsg::Drop {
            page: page.clone(),
            placement: Placement::Sibling {
                parent,
                index: args.index,
            },
        },
    );
    check_editor(&mut editor)?;

    match editor.last_outcome() {
        Some(MoveOutcome::Confirmed { .. }) => {
            let moved = editor.store().page(&page)?;
            writeln!(
                out,
                "moved {page} under {} at {}",
                parent_label(moved.parent_id.as_ref()),
                moved.order_index
            )?;
        }
        _ => writeln!(out, "{page} unchanged")?,
    }
    Ok(())
}

pub fn toggle(ctx: &Context, id: &str, menu: bool, out: &mut dyn Write) -> Result<()> {
    let page = PageId::new(id);
    let (mut dispatcher, mut editor) = ctx.editor()?;
    let current = editor.store().page(&page)?;
    let op = if menu {
        RepositoryOp::SetShowInMenu {
            page: page.clone(),
            show: !current.show_in_menu,
        }
    } else {
        RepositoryOp::SetActive {
            page: page.clone(),
            active: !current.is_active,
        }
    };
    dispatcher.run(&mut editor, EditorMsg::Edit(op));
    check_editor(&mut editor)?;

    let updated = editor.store().page(&page)?;
    let (flag, value) = if menu {
        ("show_in_menu", updated.show_in_menu)
    } else {
        ("is_active", updated.is_active)
    };
    writeln!(out, "{page}: {flag} = {value}")?;
    Ok(())
}

pub fn delete(ctx: &Context, id: &str, cascade: bool, out: &mut dyn Write) -> Result<()> {
    let page = PageId::new(id);
    let (mut dispatcher, mut editor) = ctx.editor()?;
    let below = collect_descendants(editor.store(), &page)?;
    let children = editor.store().child_ids(Some(&page)).len();
    let strategy = if cascade {
        DeleteStrategy::Cascade
    } else {
        DeleteStrategy::PromoteChildren
    };
    dispatcher.run(
        &mut editor,
        EditorMsg::Edit(RepositoryOp::Delete {
            page: page.clone(),
            strategy,
        }),
    );
    check_editor(&mut editor)?;

    match strategy {
        DeleteStrategy::Cascade => {
            writeln!(out, "deleted {page} and {} descendant(s)", below.len())?;
        }
        DeleteStrategy::PromoteChildren => {
            writeln!(
                out,
                "deleted {page}; {children} child page(s) moved to root"
            )?;
        }
    }
    Ok(())
}

pub fn check(ctx: &Context, out: &mut dyn Write) -> Result<()> {
    let store = ctx.load()?;
    store.validate()?;
    let roots = store.children(None).len();
    if ctx.json {
        return print_json(
            out,
            &json!({ "status": "ok", "pages": store.len(), "roots": roots }),
        );
    }
    writeln!(out, "ok: {} pages, {roots} roots", store.len())?;
    Ok(())
}
