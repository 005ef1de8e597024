use chrono::{DateTime, Local, Utc};

use codehub_models::core::Task;
use codehub_models::web::ContainerInfo;

pub fn render_containers(containers: &[ContainerInfo]) {
    if containers.is_empty() {
        println!("No containers reported by the control plane.");
        return;
    }

    let headers = ["id", "codebase", "status", "last activity"];
    let rows: Vec<Vec<String>> = containers
        .iter()
        .map(|c| {
            vec![
                c.id.clone(),
                c.dir_name.clone(),
                c.status.clone(),
                c.last_activity.clone().unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    print_table(&headers, &rows);
}

pub fn render_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks scheduled yet.");
        return;
    }

    let headers = [
        "id", "name", "codebase", "action", "scheduled", "status", "last run", "runs",
    ];
    let rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                t.name.clone(),
                t.codebase.clone(),
                t.action.to_string(),
                local_time(&t.schedule_time),
                t.status.to_string(),
                t.last_run
                    .as_ref()
                    .map(local_time)
                    .unwrap_or_else(|| "never".to_string()),
                t.run_count.to_string(),
            ]
        })
        .collect();
    print_table(&headers, &rows);
}

fn local_time(time: &DateTime<Utc>) -> String {
    time.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, value) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(value.chars().count());
        }
    }

    let header_row: Vec<String> = headers.iter().map(|h| (*h).to_string()).collect();
    print_row(&header_row, &widths);
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    print_row(&separator, &widths);
    for row in rows {
        print_row(row, &widths);
    }
}

fn print_row(values: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (idx, value) in values.iter().enumerate() {
        if idx > 0 {
            line.push_str("  ");
        }
        line.push_str(value);
        let padding = widths[idx].saturating_sub(value.chars().count());
        line.push_str(&" ".repeat(padding));
    }
    println!("{}", line.trim_end());
}
