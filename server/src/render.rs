//! HTML rendering for TidyList pages.
//!
//! Pages are assembled as plain strings; every piece of user-supplied text
//! goes through [`escape_html`] before it reaches the page. Display order
//! comes from the stable partitions in [`crate::lists`] and never reflects
//! mutated storage order.

use crate::lists::{remaining_todos, sort_lists, sort_todos};
use crate::types::{Flash, TodoList};

/// Escapes the five HTML-significant characters in user text.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Wraps page content in the shared layout, including any flash messages.
fn layout(title: &str, flash: &Flash, body: &str) -> String {
    let mut messages = String::new();
    if let Some(ref success) = flash.success {
        messages.push_str(&format!(
            "<div class=\"flash success\">{}</div>\n",
            escape_html(success)
        ));
    }
    if let Some(ref error) = flash.error {
        messages.push_str(&format!(
            "<div class=\"flash error\">{}</div>\n",
            escape_html(error)
        ));
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} - TidyList</title>\n</head>\n<body>\n\
         <header><h1><a href=\"/lists\">TidyList</a></h1></header>\n\
         {messages}<main>\n{body}</main>\n</body>\n</html>\n",
        title = escape_html(title),
        messages = messages,
        body = body,
    )
}

/// The list-of-lists page (`GET /lists`).
///
/// Lists are shown incomplete-first; each entry links to its true
/// underlying position and shows its remaining/total count.
pub fn lists_page(lists: &[TodoList], flash: &Flash) -> String {
    let mut body = String::from("<h2>Todo Lists</h2>\n<ul class=\"lists\">\n");

    for (position, list) in sort_lists(lists) {
        let class = if list.all_complete { "complete" } else { "" };
        body.push_str(&format!(
            "<li class=\"{class}\"><a href=\"/lists/{position}\">{name}</a> \
             <span class=\"count\">{remaining} / {total}</span></li>\n",
            class = class,
            position = position,
            name = escape_html(&list.name),
            remaining = remaining_todos(list),
            total = list.todos.len(),
        ));
    }

    body.push_str("</ul>\n<p><a href=\"/lists/new\">New List</a></p>\n");
    layout("All Lists", flash, &body)
}

/// The list creation form (`GET /lists/new`), optionally pre-filled with
/// the input from a failed submission.
pub fn new_list_page(flash: &Flash, prior_input: &str) -> String {
    let body = format!(
        "<h2>New Todo List</h2>\n\
         <form action=\"/lists\" method=\"post\">\n\
         <label for=\"list_name\">Enter the name for your new list:</label>\n\
         <input type=\"text\" id=\"list_name\" name=\"list_name\" value=\"{value}\">\n\
         <button type=\"submit\">Save</button>\n</form>\n\
         <p><a href=\"/lists\">Cancel</a></p>\n",
        value = escape_html(prior_input),
    );
    layout("New List", flash, &body)
}

/// A single list's page (`GET /lists/{num}`): todos incomplete-first, each
/// with toggle and delete forms targeting its original index.
pub fn list_page(list: &TodoList, flash: &Flash) -> String {
    let position = list.position;
    let mut body = format!(
        "<h2>{name}</h2>\n\
         <p><a href=\"/lists/{position}/edit\">Edit List</a></p>\n\
         <ul class=\"todos\">\n",
        name = escape_html(&list.name),
    );

    for (index, todo) in sort_todos(&list.todos) {
        let class = if todo.completed { "complete" } else { "" };
        let next_state = !todo.completed;
        body.push_str(&format!(
            "<li class=\"{class}\">\n\
             <form action=\"/lists/{position}/{index}/toggle\" method=\"post\">\n\
             <input type=\"hidden\" name=\"completed\" value=\"{next_state}\">\n\
             <button type=\"submit\">{label}</button>\n</form>\n\
             <span class=\"todo-name\">{name}</span>\n\
             <form action=\"/lists/{position}/{index}/delete\" method=\"post\">\n\
             <button type=\"submit\">Delete</button>\n</form>\n</li>\n",
            class = class,
            position = position,
            index = index,
            next_state = next_state,
            label = if todo.completed { "Undo" } else { "Complete" },
            name = escape_html(&todo.name),
        ));
    }

    body.push_str(&format!(
        "</ul>\n\
         <form action=\"/lists/{position}/complete_all\" method=\"post\">\n\
         <button type=\"submit\">Complete All</button>\n</form>\n\
         <form action=\"/lists/{position}/todos\" method=\"post\">\n\
         <label for=\"todo\">Enter a new todo item:</label>\n\
         <input type=\"text\" id=\"todo\" name=\"todo\">\n\
         <button type=\"submit\">Add</button>\n</form>\n",
    ));

    layout(&list.name, flash, &body)
}

/// The rename form (`GET /lists/{num}/edit`).
pub fn edit_list_page(list: &TodoList, flash: &Flash) -> String {
    let position = list.position;
    let body = format!(
        "<h2>Editing \"{name}\"</h2>\n\
         <form action=\"/lists/{position}\" method=\"post\">\n\
         <label for=\"list_name\">Enter the new name:</label>\n\
         <input type=\"text\" id=\"list_name\" name=\"list_name\" value=\"{name}\">\n\
         <button type=\"submit\">Save</button>\n</form>\n\
         <form action=\"/lists/{position}/delete\" method=\"post\">\n\
         <button type=\"submit\">Delete List</button>\n</form>\n\
         <p><a href=\"/lists/{position}\">Cancel</a></p>\n",
        name = escape_html(&list.name),
        position = position,
    );
    layout("Edit List", flash, &body)
}

/// The 404 page for unresolvable list/todo indices.
pub fn not_found_page() -> String {
    let body = "<h2>Not Found</h2>\n\
                <p>The page or item you asked for does not exist.</p>\n\
                <p><a href=\"/lists\">Back to your lists</a></p>\n";
    layout("Not Found", &Flash::default(), body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lists::recompute_completion;
    use crate::types::Todo;

    fn sample_list() -> TodoList {
        let mut list = TodoList::new(2, "Groceries & Sundries");
        list.todos.push(Todo {
            name: "Milk <1L>".to_string(),
            completed: true,
        });
        list.todos.push(Todo::new("Eggs"));
        recompute_completion(&mut list);
        list
    }

    #[test]
    fn escape_html_handles_all_special_chars() {
        assert_eq!(
            escape_html("<b>\"a\" & 'b'</b>"),
            "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn lists_page_escapes_names_and_links_positions() {
        let mut lists = vec![TodoList::new(0, "<script>")];
        lists.push(TodoList::new(1, "Second"));

        let html = lists_page(&lists, &Flash::default());
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("href=\"/lists/0\""));
        assert!(html.contains("href=\"/lists/1\""));
        assert!(html.contains("0 / 0"));
    }

    #[test]
    fn lists_page_orders_incomplete_first() {
        let mut done = TodoList::new(0, "Done");
        done.todos.push(Todo {
            name: "x".to_string(),
            completed: true,
        });
        recompute_completion(&mut done);
        let open = TodoList::new(1, "Open");

        let html = lists_page(&[done, open], &Flash::default());
        let open_at = html.find("Open").unwrap();
        let done_at = html.find("Done").unwrap();
        assert!(open_at < done_at);
        // The complete list still links to its true position 0.
        assert!(html.contains("class=\"complete\"><a href=\"/lists/0\""));
    }

    #[test]
    fn list_page_targets_original_todo_indices() {
        let list = sample_list();
        let html = list_page(&list, &Flash::default());

        // Completed "Milk" sorts after "Eggs" but keeps index 0.
        assert!(html.contains("/lists/2/0/toggle"));
        assert!(html.contains("/lists/2/1/toggle"));
        assert!(html.contains("/lists/2/0/delete"));
        assert!(html.contains("Milk &lt;1L&gt;"));

        let eggs_at = html.find("Eggs").unwrap();
        let milk_at = html.find("Milk").unwrap();
        assert!(eggs_at < milk_at);
    }

    #[test]
    fn list_page_toggle_carries_inverted_state() {
        let list = sample_list();
        let html = list_page(&list, &Flash::default());
        // Completed todo toggles back to false, incomplete to true.
        assert!(html.contains("name=\"completed\" value=\"false\""));
        assert!(html.contains("name=\"completed\" value=\"true\""));
    }

    #[test]
    fn new_list_page_preserves_prior_input() {
        let html = new_list_page(&Flash::default(), "My \"draft\"");
        assert!(html.contains("value=\"My &quot;draft&quot;\""));
    }

    #[test]
    fn edit_list_page_prefills_current_name() {
        let list = sample_list();
        let html = edit_list_page(&list, &Flash::default());
        assert!(html.contains("value=\"Groceries &amp; Sundries\""));
        assert!(html.contains("action=\"/lists/2\""));
        assert!(html.contains("action=\"/lists/2/delete\""));
    }

    #[test]
    fn flash_messages_render_once_per_page() {
        let flash = Flash {
            success: Some("The list has been created.".to_string()),
            error: None,
        };
        let html = lists_page(&[], &flash);
        assert!(html.contains("flash success"));
        assert!(html.contains("The list has been created."));

        let html = lists_page(&[], &Flash::default());
        assert!(!html.contains("flash success"));
    }

    #[test]
    fn not_found_page_links_home() {
        let html = not_found_page();
        assert!(html.contains("Not Found"));
        assert!(html.contains("href=\"/lists\""));
    }
}
