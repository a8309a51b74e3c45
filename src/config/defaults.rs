use std::collections::HashSet;

pub struct DefaultConfig;

impl DefaultConfig {
    /// 默认忽略的目录名（整棵子树都不会被访问）
    pub fn default_ignore_dirs() -> HashSet<String> {
        // 版本控制、依赖目录和构建产物
        ["node_modules", "vendor", ".git", "target"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// 默认忽略的文件扩展名（包含前导 `.`，区分大小写）
    pub fn default_ignore_extensions() -> HashSet<String> {
        [
            // 可执行文件和动态库
            ".exe", ".dll", ".so", ".dylib",
            // 压缩包
            ".zip", ".tar", ".gz", ".bz2", ".xz", ".jar", ".whl",
            // 图片
            ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".svg", ".svgz", ".ico", ".icns", ".psd",
            // 音频
            ".mp3", ".wav", ".flac", ".ogg", ".aac",
            // 视频
            ".mp4", ".mkv", ".avi", ".mov", ".wmv",
            // 文档
            ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
            ".odt", ".ods", ".odp", ".odg",
            // 字体
            ".ttf", ".otf", ".woff", ".woff2", ".eot",
            // IDE 与工程元数据
            ".plist", ".url", ".pbxproj", ".sln", ".vcxproj", ".csproj", ".vcproj",
            ".filters", ".iml", ".natvis", ".storyboard", ".lnk", ".idb",
            // 构建产物和编译对象
            ".tlog", ".ilk", ".pdb", ".lib", ".o", ".obj", ".a", ".class",
            ".pyc", ".pyo", ".rmeta", ".rlib", ".node", ".d", ".map", ".rc",
            // 数据库、日志和临时文件
            ".sqlite", ".gdb", ".db", ".dat", ".dat_old", ".log", ".tmp", ".lock", ".bin",
            // 其他生成文件
            ".uasset", ".mcmeta", ".mca", ".schem", ".dox", ".mod", ".in",
            ".TAG", ".repositories", ".MF",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// 单行允许的最大字节数
    pub const MAX_LINE_BYTES: usize = 1024 * 1024;

    /// 默认并发上限，0 表示不限制
    pub fn default_concurrency_limit() -> usize {
        num_cpus::get().max(4) * 16
    }
}
