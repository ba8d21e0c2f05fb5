use super::*;

test_case!(test_write_and_read, {
    let log = LogCore::new(LogLevel::Debug, LogLevel::Warning);

    test_log!(log, LogLevel::Info, "test message");
    kassert!(log._log_len() == 1);

    let entry = log._read_log().unwrap();
    kassert!(entry.message() == "test message");
    kassert!(entry.level() == LogLevel::Info);
    kassert!(entry.seq() == 1);

    kassert!(log._log_len() == 0);
    kassert!(log._read_log().is_none());
});

test_case!(test_format_arguments, {
    let log = LogCore::new(LogLevel::Debug, LogLevel::Warning);

    test_log!(log, LogLevel::Info, "Device size = {}", 512);
    test_log!(log, LogLevel::Debug, "perm: {:#x}", 0x11);

    kassert!(log._read_log().unwrap().message() == "Device size = 512");
    kassert!(log._read_log().unwrap().message() == "perm: 0x11");
});

test_case!(test_long_message_truncated_on_char_boundary, {
    let log = LogCore::new(LogLevel::Debug, LogLevel::Warning);

    // 每个字符 3 字节，截断点不能落在字符中间
    let long: String = core::iter::repeat('设').take(200).collect();
    test_log!(log, LogLevel::Info, "{}", long);

    let entry = log._read_log().unwrap();
    let msg = entry.message();
    kassert!(!msg.is_empty());
    kassert!(msg.len() <= super::super::config::MAX_LOG_MESSAGE_LENGTH);
    kassert!(msg.len() % 3 == 0);
});

test_case!(test_sink_receives_console_levels_only, {
    let log = LogCore::new(LogLevel::Debug, LogLevel::Warning);
    let sink = Arc::new(RecordingSink::default());
    log._set_sink(Some(sink.clone()));

    test_log!(log, LogLevel::Error, "no space left on the device");
    test_log!(log, LogLevel::Info, "open was successful");

    let lines = sink.lines.lock();
    kassert!(lines.len() == 1);
    kassert!(lines[0] == "no space left on the device");
    // 两条都进入缓冲区
    kassert!(log._log_len() == 2);
});

test_case!(test_display_format, {
    let log = LogCore::new(LogLevel::Debug, LogLevel::Warning);
    test_log!(log, LogLevel::Error, "boom");
    let line = alloc::format!("{}", log._read_log().unwrap());
    kassert!(line.ends_with("[ERR] boom"));
});

test_case!(test_global_macros_reach_sink, {
    let sink = Arc::new(RecordingSink::default());
    crate::log::set_sink(sink.clone());

    pr_crit!("pcd marker {}", 42);
    dev_err!("pcdev-9", "device marker");
    pr_debug!("filtered by the global level");
    crate::log::clear_sink();

    let lines = sink.lines.lock();
    kassert!(lines.iter().any(|l| l == "pcd marker 42"));
    kassert!(lines.iter().any(|l| l == "pcdev-9: device marker"));
    kassert!(!lines.iter().any(|l| l.contains("filtered")));
});
