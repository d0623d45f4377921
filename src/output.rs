use crate::model::Task;

/// One line per task: status icon, right-aligned id, description.
/// Continuation lines of multi-line descriptions are indented under the text.
pub fn format_task_list(tasks: &[Task]) -> String {
    let width = tasks
        .iter()
        .map(|t| t.id.to_string().len())
        .max()
        .unwrap_or(1);
    let indent = " ".repeat(width + 4);

    let mut out = String::new();
    for task in tasks {
        let mut lines = task.description.lines();
        let first = lines.next().unwrap_or("");
        out.push_str(&format!(
            "{} {:>width$}  {}\n",
            task.icon(),
            task.id,
            first
        ));
        for line in lines {
            out.push_str(&format!("{indent}{line}\n"));
        }
    }
    out
}
