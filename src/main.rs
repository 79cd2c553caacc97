// ==========================================
// 考场座位编排引擎 - 命令行入口
// ==========================================
// 用法:
//   exam-seating [--db PATH] import-halls FILE
//   exam-seating [--db PATH] import-roster EXAM_ID FILE
//   exam-seating [--db PATH] allocate EXAM_ID [SEED] [row_major|column_major] [hard|soft]
//   exam-seating [--db PATH] show RUN_ID
// 结果以 JSON 输出到 stdout，日志输出到 stderr
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use exam_seating::api::CreateRunRequest;
use exam_seating::app::{get_default_db_path, AppState};
use exam_seating::domain::types::{AdjacencyStrictness, SeatNumbering};
use exam_seating::logging;
use serde::Serialize;

const USAGE: &str = "用法:
  exam-seating [--db PATH] import-halls FILE
  exam-seating [--db PATH] import-roster EXAM_ID FILE
  exam-seating [--db PATH] allocate EXAM_ID [SEED] [row_major|column_major] [hard|soft]
  exam-seating [--db PATH] show RUN_ID";

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn next_arg(args: &mut impl Iterator<Item = String>, name: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("缺少参数 {}\n{}", name, USAGE))
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1).peekable();

    let db_path = if args.peek().map(String::as_str) == Some("--db") {
        args.next();
        next_arg(&mut args, "PATH")?
    } else {
        get_default_db_path()
    };

    tracing::info!(version = exam_seating::VERSION, db_path = %db_path, "{}", exam_seating::APP_NAME);

    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;
    let command = next_arg(&mut args, "COMMAND")?;

    match command.as_str() {
        "import-halls" => {
            let file = next_arg(&mut args, "FILE")?;
            let response = state.import_api.import_halls(&file)?;
            print_json(&response)?;
        }
        "import-roster" => {
            let exam_id = next_arg(&mut args, "EXAM_ID")?;
            let file = next_arg(&mut args, "FILE")?;
            let response = state.import_api.import_roster(&exam_id, &file)?;
            print_json(&response)?;
        }
        "allocate" => {
            let exam_id = next_arg(&mut args, "EXAM_ID")?;
            let mut request = CreateRunRequest::new(exam_id);
            request.seed = args.next().filter(|s| !s.trim().is_empty());
            if let Some(raw) = args.next() {
                request.seat_numbering = Some(
                    raw.parse::<SeatNumbering>()
                        .map_err(|e| anyhow!(e))
                        .context("座位编号策略参数无效")?,
                );
            }
            if let Some(raw) = args.next() {
                request.adjacency_strictness = Some(
                    raw.parse::<AdjacencyStrictness>()
                        .map_err(|e| anyhow!(e))
                        .context("相邻约束强度参数无效")?,
                );
            }

            let run = state.allocation_api.create_run(request).await?;
            let outcome = state.allocation_api.execute_run(&run.run_id).await?;
            print_json(&outcome)?;
        }
        "show" => {
            let run_id = next_arg(&mut args, "RUN_ID")?;
            let result = state.allocation_api.get_run_result(&run_id)?;
            print_json(&result)?;
        }
        other => bail!("未知命令: {}\n{}", other, USAGE),
    }

    Ok(())
}
